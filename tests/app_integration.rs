use bundlequote::core::payment::CustomerData;
use rust_decimal::Decimal;
use std::fs;
use tracing::info;

mod test_utils {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const FREQUENCIES: &str = r#"
frequencies:
  - id: avulso
    label: "Avulso"
    multiplier: 1.25
  - id: mensal
    label: "Mensal (1x)"
    multiplier: 1.0
  - id: semanal-1
    label: "1x/Semana"
    multiplier: 3.6
"#;

    pub fn write_config(dir: &std::path::Path, extra: &str) -> std::path::PathBuf {
        let path = dir.join("config.yaml");
        std::fs::write(&path, format!("{FREQUENCIES}\n{extra}")).expect("Failed to write config");
        path
    }

    pub async fn create_asaas_mock_server(expected_value: f64) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/customers"))
            .and(header("access_token", "it-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "cus_it"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/payments"))
            .and(body_partial_json(json!({
                "customer": "cus_it",
                "billingType": "PIX",
                "value": expected_value
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pay_it",
                "invoiceUrl": "https://www.asaas.com/i/pay_it",
                "value": expected_value
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/payments/pay_it/pixQrCode"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "encodedImage": "iVBORw0KGgo=",
                "payload": "00020101021226820014br.gov.bcb.pix"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        mock_server
    }
}

#[test_log::test]
fn test_price_plan_from_config_file() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(
        dir.path(),
        r#"
plan:
  services:
    - service: zeladoria-premium
      area: 150
      floors: 2
    - service: corte-grama
      frequency: semanal-1
      area: 350
    - service: limpeza-1
      frequency: avulso
  co_host:
    enabled: true
    estimated_revenue: 5000
"#,
    );

    let config = bundlequote::load_config(config_path.to_str(), None).expect("Failed to load");
    let (_, quote) = bundlequote::price_plan(&config).expect("Failed to price");
    info!(total = %quote.total, "Priced plan");

    let ids: Vec<_> = quote.lines.iter().map(|l| l.service_id.as_str()).collect();
    assert_eq!(ids, vec!["limpeza-1", "zeladoria-premium", "corte-grama"]);
    // 180 * 1.25 + 530 + 250 * 3.6 + 5000 * 0.20
    assert_eq!(quote.lines[0].line_total, Decimal::from(225));
    assert_eq!(quote.lines[1].line_total, Decimal::from(530));
    assert_eq!(quote.lines[2].line_total, Decimal::from(900));
    assert_eq!(quote.total, Decimal::from(2655));
}

#[test_log::test]
fn test_plan_file_overrides_config_plan() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(
        dir.path(),
        "plan:\n  services:\n    - service: limpeza-1\n",
    );
    let plan_path = dir.path().join("plan.yaml");
    fs::write(
        &plan_path,
        "services: []\nco_host:\n  enabled: true\n  estimated_revenue: 5000\n",
    )
    .expect("Failed to write plan");

    let config = bundlequote::load_config(config_path.to_str(), plan_path.to_str())
        .expect("Failed to load");
    let (_, quote) = bundlequote::price_plan(&config).expect("Failed to price");
    assert!(quote.lines.is_empty());
    assert_eq!(quote.total, Decimal::from(1000));
}

#[test_log::test(tokio::test)]
async fn test_quote_and_proposal_commands() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(
        dir.path(),
        "plan:\n  services:\n    - service: manutencao-1\n      frequency: semanal-1\n",
    );
    let output = dir.path().join("proposta.txt");

    let result = bundlequote::run_command(
        bundlequote::AppCommand::Quote { json: true },
        config_path.to_str(),
        None,
    )
    .await;
    assert!(result.is_ok(), "Quote failed with: {:?}", result.err());

    let result = bundlequote::run_command(
        bundlequote::AppCommand::Proposal {
            output: Some(output.clone()),
            customer: Some(CustomerData::new("Maria Souza", "123.456.789-09", "")),
            json: false,
        },
        config_path.to_str(),
        None,
    )
    .await;
    assert!(result.is_ok(), "Proposal failed with: {:?}", result.err());

    let doc = fs::read_to_string(&output).expect("Proposal not written");
    assert!(doc.contains("Cliente: Maria Souza"));
    assert!(doc.contains("Reparos e Manutenção"));
    assert!(doc.contains("INVESTIMENTO TOTAL: R$ 900,00"));
}

#[test_log::test(tokio::test)]
async fn test_checkout_flow_with_mock() {
    // 220 * 3.6 = 792
    let mock_server = test_utils::create_asaas_mock_server(792.0).await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(
        dir.path(),
        &format!(
            r#"
plan:
  services:
    - service: jardinagem-1
      frequency: semanal-1
providers:
  asaas:
    base_url: "{}"
    access_token: "it-token"
"#,
            mock_server.uri()
        ),
    );

    let result = bundlequote::run_command(
        bundlequote::AppCommand::Checkout {
            customer: CustomerData::new("Maria Souza", "12345678909", "maria@example.com"),
        },
        config_path.to_str(),
        None,
    )
    .await;
    assert!(result.is_ok(), "Checkout failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_checkout_refuses_empty_plan() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(
        dir.path(),
        "providers:\n  asaas:\n    base_url: \"http://127.0.0.1:9\"\n    access_token: \"x\"\n",
    );

    let result = bundlequote::run_command(
        bundlequote::AppCommand::Checkout {
            customer: CustomerData::new("Maria Souza", "12345678909", "maria@example.com"),
        },
        config_path.to_str(),
        None,
    )
    .await;
    let err = result.expect_err("Empty plan must not be charged");
    assert!(err.to_string().contains("zero"));
}

#[test_log::test]
fn test_invalid_plan_fails_fast() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(
        dir.path(),
        "plan:\n  services:\n    - service: limpeza-1\n      frequency: quinzenal\n",
    );

    let err = bundlequote::load_config(config_path.to_str(), None).expect_err("Should fail");
    assert!(format!("{err:#}").contains("Unknown frequency: quinzenal"));
}

#[test_log::test(tokio::test)]
async fn test_negative_revenue_is_clamped_before_pricing() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(
        dir.path(),
        r#"
plan:
  services:
    - service: limpeza-1
  co_host:
    enabled: true
    estimated_revenue: -5000
providers:
  asaas:
    base_url: "http://127.0.0.1:9"
    access_token: "x"
"#,
    );

    let config = bundlequote::load_config(config_path.to_str(), None).expect("Failed to load");
    let (_, quote) = bundlequote::price_plan(&config).expect("Failed to price");
    let co_host = quote.co_host.as_ref().expect("Co-host line missing");
    assert_eq!(co_host.estimated_revenue, Decimal::ZERO);
    assert_eq!(co_host.fee, Decimal::ZERO);
    assert_eq!(quote.total, Decimal::from(180));

    let plan_path = dir.path().join("plan.yaml");
    fs::write(
        &plan_path,
        "co_host:\n  enabled: true\n  estimated_revenue: -5000\n",
    )
    .expect("Failed to write plan");
    let result = bundlequote::run_command(
        bundlequote::AppCommand::Checkout {
            customer: CustomerData::new("Maria Souza", "12345678909", "maria@example.com"),
        },
        config_path.to_str(),
        plan_path.to_str(),
    )
    .await;
    let err = result.expect_err("Negative revenue must not be charged");
    assert!(err.to_string().contains("zero"));
}
