use serde::Serialize;

/// Body of the search form, posted `application/x-www-form-urlencoded`.
///
/// `Submit.x`/`Submit.y` are the click coordinates of the image submit button;
/// the server rejects requests without them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchForm<'a> {
    pub mbstatus: &'static str,
    pub htno: &'a str,
    #[serde(rename = "Submit.x")]
    pub submit_x: &'static str,
    #[serde(rename = "Submit.y")]
    pub submit_y: &'static str,
}

impl<'a> SearchForm<'a> {
    pub fn new(hallticket: &'a str) -> Self {
        Self {
            mbstatus: "SEARCH",
            htno: hallticket,
            submit_x: "25",
            submit_y: "8",
        }
    }
}
