use std::fmt::Write as _;
use std::str::FromStr;

use crate::search::Seating;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format `{other}` (expected text or json)")),
        }
    }
}

pub fn render(seating: &Seating, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(render_text(seating)),
        OutputFormat::Json => serde_json::to_string_pretty(seating),
    }
}

pub fn render_text(seating: &Seating) -> String {
    if seating.arrangements.is_empty() {
        return "No guests to seat.\n".to_string();
    }
    let mut out = format!("Optimal seating (score {}):\n", seating.score);
    for arrangement in &seating.arrangements {
        let _ = writeln!(out, "  {arrangement}");
    }
    let hidden = seating.winners.saturating_sub(seating.arrangements.len() as u64);
    if hidden > 0 {
        let _ = writeln!(out, "  ... and {hidden} more");
    }
    out
}
