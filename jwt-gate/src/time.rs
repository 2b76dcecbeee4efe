use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// current time, in seconds since the UNIX epoch
pub(crate) fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// RFC 3339 rendering of a claim timestamp, for logs
pub(crate) fn print(timestamp: i64) -> String {
    OffsetDateTime::from_unix_timestamp(timestamp)
        .ok()
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    #[test]
    fn prints_rfc3339() {
        assert_eq!(super::print(0), "1970-01-01T00:00:00Z");
    }
}
