mod commands;
mod terminal;

use commands::{CommandLine, Commands, convert, fetch};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let quiet = commands.quiet;

    logging::init(quiet);
    print::banner(quiet);

    match commands.command {
        Commands::Fetch(args) => fetch::fetch(args, quiet).await,
        Commands::Convert(args) => convert::convert(args, quiet),
    }
}
