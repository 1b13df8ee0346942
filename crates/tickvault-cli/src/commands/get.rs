use serde::Serialize;
use tickvault_core::{
    RetrievalConfig, RetrievalError, RetrievalOrchestrator, ServeRequest, ServeResponse,
    TradingDate,
};

use crate::cli::GetArgs;

#[derive(Debug, Serialize)]
pub struct GetResponseData {
    pub data: ServeResponse,
}

pub async fn run(
    args: &GetArgs,
    config: &RetrievalConfig,
) -> Result<GetResponseData, RetrievalError> {
    let request = ServeRequest::new(args.symbol.as_str())
        .with_range(
            parse_bound(args.start_date.as_deref())?,
            parse_bound(args.end_date.as_deref())?,
        )
        .with_force_refresh(args.force_refresh);

    let orchestrator = RetrievalOrchestrator::from_config(config)?;
    let data = orchestrator.serve(request).await?;
    Ok(GetResponseData { data })
}

fn parse_bound(raw: Option<&str>) -> Result<Option<TradingDate>, RetrievalError> {
    raw.map(TradingDate::parse)
        .transpose()
        .map_err(RetrievalError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickvault_core::ErrorKind;

    #[test]
    fn date_bounds_accept_plain_dates_and_timestamps() {
        assert_eq!(parse_bound(None).expect("absent bound"), None);
        assert_eq!(
            parse_bound(Some("2024-01-03T15:00:00Z"))
                .expect("timestamp bound")
                .map(|d| d.to_string()),
            Some(String::from("2024-01-03"))
        );
    }

    #[test]
    fn malformed_date_is_an_invalid_request() {
        let error = parse_bound(Some("03/01/2024")).expect_err("must fail");
        assert_eq!(error.kind(), ErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn invalid_symbol_fails_before_any_network_call() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = RetrievalConfig::default()
            .with_data_dir(dir.path())
            .with_base_url("http://127.0.0.1:9/unreachable");
        let args = GetArgs {
            symbol: String::from("BAD SYMBOL"),
            start_date: None,
            end_date: None,
            force_refresh: false,
        };

        let error = run(&args, &config).await.expect_err("must fail");
        assert_eq!(error.kind(), ErrorKind::InvalidRequest);
    }
}
