// Licensed under the Apache License, Version 2.0.

//! Operating-system command events recognised by the parser and handed to
//! the UI adapter. Unrecognised `Ps` values are dropped during parsing and
//! never reach this type.

/// An OSC sequence the parser understood. `SetTitle` is the only variant
/// this crate's dispatch table currently produces (`Ps` 0/1/2); the enum is
/// kept open (`#[non_exhaustive]`-style growth via new variants, not bits)
/// so a future Ps can be added without breaking the match arms that matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OscEvent {
    /// `Ps` 0/1/2: set window/tab/icon title. The distinction between the
    /// three isn't observable outside this core, so they collapse to one
    /// variant; content is the only externally visible effect.
    SetTitle(String),
}

/// Parses the `Ps ; Pt` body of an OSC sequence (bytes already stripped of
/// the `ESC ]` introducer and the BEL/ST terminator). Returns `None` for any
/// `Ps` this crate doesn't recognise, per "unknown Ps are ignored."
#[must_use]
pub fn parse_osc(body: &[u8]) -> Option<OscEvent> {
    let body = std::str::from_utf8(body).ok()?;
    let mut parts = body.splitn(2, ';');
    let ps = parts.next()?;
    let pt = parts.next().unwrap_or("");
    match ps {
        "0" | "1" | "2" => Some(OscEvent::SetTitle(pt.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_title_setting_ps_values() {
        assert_eq!(parse_osc(b"0;hello"), Some(OscEvent::SetTitle("hello".to_string())));
        assert_eq!(parse_osc(b"1;tab"), Some(OscEvent::SetTitle("tab".to_string())));
        assert_eq!(parse_osc(b"2;icon"), Some(OscEvent::SetTitle("icon".to_string())));
    }

    #[test]
    fn unknown_ps_ignored() {
        assert_eq!(parse_osc(b"9;4;50"), None);
        assert_eq!(parse_osc(b"52;c;base64"), None);
    }

    #[test]
    fn missing_pt_defaults_to_empty() {
        assert_eq!(parse_osc(b"0"), Some(OscEvent::SetTitle(String::new())));
    }
}
