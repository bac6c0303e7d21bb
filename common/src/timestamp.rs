//! RFC 3339 timestamp parsing shared by every registry (`spec.md` §4.4:
//! "Timestamps are received as RFC 3339 strings and stored as absolute
//! instants").

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::CommonError;

/// Parses an RFC 3339 string into an absolute instant. Empty input is
/// rejected the same way any other unparseable timestamp is — the
/// dispatcher's separate `BadArg`-for-empty-string check (`spec.md` §6)
/// happens before this is ever called, but this function does not rely on
/// that and is safe to call standalone.
pub fn parse_rfc3339(s: &str) -> Result<OffsetDateTime, CommonError> {
    OffsetDateTime::parse(s, &Rfc3339).map_err(|_| CommonError::InvalidTimestamp(s.to_string()))
}

/// Renders an absolute instant back to its canonical RFC 3339 form, used
/// when serializing persisted records (`spec.md` §6: "Timestamps serialize
/// as RFC 3339").
pub fn format_rfc3339(t: OffsetDateTime) -> String {
    t.format(&Rfc3339)
        .expect("OffsetDateTime always formats to RFC 3339")
}
