//! Interactive fallbacks for arguments left off the command line.

use anyhow::{Context, bail};
use console::Term;
use tracing::warn;

/// Accepts an absolute `http://` or `https://` URL.
pub fn parse_url(input: &str) -> anyhow::Result<String> {
    let url = input.trim();
    if url.is_empty() {
        bail!("a result page URL is required");
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("URL must start with http:// or https://, got '{url}'");
    }
    Ok(url.to_string())
}

/// Empty input takes `default`.
pub fn parse_ticket(input: &str, default: u64) -> anyhow::Result<u64> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(default);
    }
    input
        .parse()
        .with_context(|| format!("'{input}' is not a hall ticket number"))
}

fn ask(term: &Term, question: &str) -> anyhow::Result<String> {
    term.write_str(question)?;
    Ok(term.read_line()?)
}

pub fn ask_url(term: &Term) -> anyhow::Result<String> {
    let answer = ask(term, "Result page URL: ")?;
    parse_url(&answer)
}

/// Re-asks until the answer parses.
pub fn ask_ticket(term: &Term, label: &str, default: u64) -> anyhow::Result<u64> {
    loop {
        let answer = ask(term, &format!("{label} [{default}]: "))?;
        match parse_ticket(&answer, default) {
            Ok(ticket) => return Ok(ticket),
            Err(e) => warn!("{e:#}"),
        }
    }
}

/// Re-asks for the end ticket while it lies before `start`.
pub fn ask_end_after(term: &Term, start: u64, mut end: u64) -> anyhow::Result<u64> {
    while end < start {
        warn!("End hall ticket {end} is before start {start}");
        end = ask_ticket(term, "End hall ticket", start)?;
    }
    Ok(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_needs_http_scheme() {
        assert_eq!(
            parse_url("  https://results.example/x.jsp \n").unwrap(),
            "https://results.example/x.jsp"
        );
        assert!(parse_url("http://a").is_ok());
        assert!(parse_url("").is_err());
        assert!(parse_url("ftp://a").is_err());
        assert!(parse_url("results.example").is_err());
    }

    #[test]
    fn ticket_defaults_on_empty_input() {
        assert_eq!(parse_ticket("", 110624861001).unwrap(), 110624861001);
        assert_eq!(parse_ticket(" 42 ", 1).unwrap(), 42);
        assert!(parse_ticket("4x2", 1).is_err());
    }

    #[test]
    fn valid_end_is_not_reprompted() {
        let term = Term::stdout();
        assert_eq!(ask_end_after(&term, 5, 9).unwrap(), 9);
        assert_eq!(ask_end_after(&term, 5, 5).unwrap(), 5);
    }
}
