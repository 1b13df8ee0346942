use tickvault_core::fetcher::parse_daily_response;
use tickvault_core::{transform, ErrorKind, FetchError, RetrievalError};

/// A provider body paired with the error kind it must classify as.
struct BodyCase {
    name: &'static str,
    body: &'static str,
    expected: ErrorKind,
}

fn failure_cases() -> Vec<BodyCase> {
    vec![
        BodyCase {
            name: "daily rate limit",
            body: r#"{"Information": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."}"#,
            expected: ErrorKind::RateLimited,
        },
        BodyCase {
            name: "per-minute throttle",
            body: r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#,
            expected: ErrorKind::RateLimited,
        },
        BodyCase {
            name: "unknown symbol",
            body: r#"{"Error Message": "Invalid API call. Please retry or visit the documentation (https://www.alphavantage.co/documentation/) for TIME_SERIES_DAILY."}"#,
            expected: ErrorKind::ProviderError,
        },
        BodyCase {
            name: "metadata only",
            body: r#"{"Meta Data": {"1. Information": "Daily Prices", "2. Symbol": "VOO"}}"#,
            expected: ErrorKind::MalformedResponse,
        },
        BodyCase {
            name: "empty object",
            body: "{}",
            expected: ErrorKind::MalformedResponse,
        },
        BodyCase {
            name: "json array",
            body: "[]",
            expected: ErrorKind::MalformedResponse,
        },
        BodyCase {
            name: "html maintenance page",
            body: "<html><body>Down for maintenance</body></html>",
            expected: ErrorKind::MalformedResponse,
        },
        BodyCase {
            name: "series is not an object",
            body: r#"{"Time Series (Daily)": "unavailable"}"#,
            expected: ErrorKind::MalformedResponse,
        },
    ]
}

fn classify(body: &str) -> Result<Vec<tickvault_core::PriceRecord>, RetrievalError> {
    let raw = parse_daily_response(body).map_err(RetrievalError::from)?;
    Ok(transform(&raw)?)
}

#[test]
fn non_data_bodies_are_classified_by_key() {
    for case in failure_cases() {
        let error = classify(case.body)
            .expect_err(&format!("case '{}' must fail", case.name));
        assert_eq!(error.kind(), case.expected, "case '{}': kind", case.name);
        assert!(
            !error.message().is_empty(),
            "case '{}': message present",
            case.name
        );
    }
}

#[test]
fn provider_message_text_is_passed_through() {
    let error = parse_daily_response(
        r#"{"Information": "Our standard API rate limit is 25 requests per day."}"#,
    )
    .expect_err("must fail");

    assert_eq!(
        error.to_string(),
        "API limit: Our standard API rate limit is 25 requests per day."
    );
}

#[test]
fn data_key_wins_over_informational_keys() {
    let body = r#"{
        "Information": "You are close to your daily limit.",
        "Time Series (Daily)": {
            "2024-01-02": {"1. open": "1.0", "2. high": "2.0", "3. low": "0.5", "4. close": "1.5", "5. volume": "100"}
        }
    }"#;

    let records = classify(body).expect("data is present");
    assert_eq!(records.len(), 1);
}

#[test]
fn full_payload_normalizes_to_ascending_numeric_records() {
    let body = r#"{
        "Meta Data": {
            "1. Information": "Daily Prices (open, high, low, close) and Volumes",
            "2. Symbol": "VOO",
            "3. Last Refreshed": "2024-01-05",
            "4. Output Size": "Full size",
            "5. Time Zone": "US/Eastern"
        },
        "Time Series (Daily)": {
            "2024-01-05": {"1. open": "430.2700", "2. high": "433.9600", "3. low": "429.7300", "4. close": "432.1600", "5. volume": "4338107"},
            "2024-01-04": {"1. open": "431.1000", "2. high": "433.4100", "3. low": "429.9300", "4. close": "430.3600", "5. volume": "3977318"},
            "2024-01-03": {"1. open": "433.1000", "2. high": "434.1300", "3. low": "430.4800", "4. close": "431.4900", "5. volume": "5155393"},
            "2024-01-02": {"1. open": "435.1500", "2. high": "437.2500", "3. low": "433.8200", "4. close": "435.4000", "5. volume": "6087398"}
        }
    }"#;

    let records = classify(body).expect("valid payload");

    let dates: Vec<String> = records.iter().map(|r| r.date.to_string()).collect();
    assert_eq!(
        dates,
        vec!["2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"]
    );

    let first = records[0];
    assert_eq!(first.open, 435.15);
    assert_eq!(first.high, 437.25);
    assert_eq!(first.low, 433.82);
    assert_eq!(first.close, 435.4);
    assert_eq!(first.volume, 6_087_398);
}

#[test]
fn any_unparseable_row_rejects_the_whole_payload() {
    // (open, volume, label) for the second row; the first row is always valid.
    let rows = [
        ("abc", "100", "open"),
        ("-1.0", "100", "negative open"),
        ("1.0", "12.5", "volume"),
        ("1.0", "-3", "negative volume"),
    ];

    for (open, volume, label) in rows {
        let body = format!(
            r#"{{"Time Series (Daily)": {{
                "2024-01-03": {{"1. open": "1.0", "2. high": "2.0", "3. low": "0.5", "4. close": "1.5", "5. volume": "100"}},
                "2024-01-02": {{"1. open": "{open}", "2. high": "2.0", "3. low": "0.5", "4. close": "1.5", "5. volume": "{volume}"}}
            }}}}"#
        );
        let error = classify(&body).expect_err(&format!("bad {label} must fail"));
        assert_eq!(error.kind(), ErrorKind::InvalidRecord, "bad {label}: kind");
        assert!(
            error.message().contains("2024-01-02"),
            "bad {label}: message names the date"
        );
    }
}

#[test]
fn row_missing_a_field_is_an_invalid_record() {
    let body = r#"{"Time Series (Daily)": {
        "2024-01-02": {"1. open": "1.0", "2. high": "2.0", "3. low": "0.5", "5. volume": "100"}
    }}"#;

    let error = classify(body).expect_err("missing close must fail");

    assert_eq!(error.kind(), ErrorKind::InvalidRecord);
    assert!(error.message().contains("close"));
}

#[test]
fn fetch_errors_map_onto_error_kinds() {
    let cases = [
        (FetchError::RateLimited(String::from("x")), ErrorKind::RateLimited, true),
        (FetchError::Provider(String::from("x")), ErrorKind::ProviderError, false),
        (
            FetchError::MalformedResponse(String::from("x")),
            ErrorKind::MalformedResponse,
            false,
        ),
        (FetchError::Transport(String::from("x")), ErrorKind::TransportFailure, true),
    ];

    for (error, kind, retryable) in cases {
        let converted = RetrievalError::from(error);
        assert_eq!(converted.kind(), kind);
        assert_eq!(converted.retryable(), retryable, "{kind}: retryable");
    }
}
