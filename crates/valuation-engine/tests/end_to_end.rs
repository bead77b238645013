use chrono::{TimeZone, Utc};
use valuation_engine::{
    build_valuation_result, compute_dcf, run_valuation, DcfParams, Fundamentals, GrowthProfile,
    MetricSignal, OverallSignal, PriceQuote, ValuationConfig, ValuationPipeline, ValuationResult,
};

fn acme() -> Fundamentals {
    Fundamentals {
        ticker: "ACME".to_string(),
        company_name: "Acme Corp".to_string(),
        sector: "Industrials".to_string(),
        pe_ratio: Some(15.0),
        forward_pe: Some(14.0),
        ttm_fcf: Some(1_000_000.0),
        shares_outstanding: Some(1_000_000.0),
        fcf_growth_rate: Some(0.06),
        total_cash: Some(0.0),
        total_debt: Some(0.0),
        roe: Some(0.20),
        debt_to_equity: Some(0.3),
        revenue_growth: Some(0.05),
        earnings_growth: Some(0.05),
        fetched_at: Utc.with_ymd_and_hms(2026, 10, 1, 14, 30, 0).unwrap(),
        ..Default::default()
    }
}

fn quote(ticker: &str, price: f64) -> PriceQuote {
    PriceQuote {
        ticker: ticker.to_string(),
        price,
        market_cap: None,
        updated_at: Utc.with_ymd_and_hms(2026, 10, 1, 15, 0, 0).unwrap(),
    }
}

/// A spread of companies from thin data to fully populated growth names
fn universe() -> (Vec<Fundamentals>, Vec<PriceQuote>) {
    let funds = vec![
        acme(),
        Fundamentals {
            ticker: "GRWTH".to_string(),
            company_name: "Growth Systems".to_string(),
            sector: "Technology".to_string(),
            shares_outstanding: Some(2.5e9),
            ttm_fcf: Some(9.0e9),
            fcf_growth_rate: Some(0.35),
            total_cash: Some(3.0e10),
            total_debt: Some(1.2e10),
            pe_ratio: Some(48.0),
            forward_pe: Some(36.0),
            peg_ratio: Some(1.6),
            ev_ebitda: Some(33.0),
            roe: Some(0.41),
            debt_to_equity: Some(0.6),
            revenue_growth: Some(0.27),
            earnings_growth: Some(0.31),
            analyst_target: Some(260.0),
            beta: Some(1.3),
            ..Default::default()
        },
        Fundamentals {
            ticker: "LEVRD".to_string(),
            company_name: "Leveraged Holdings".to_string(),
            sector: "Utilities".to_string(),
            shares_outstanding: Some(1.0e8),
            ttm_fcf: Some(1.0e7),
            total_debt: Some(9.0e10),
            pe_ratio: Some(22.0),
            forward_pe: Some(20.0),
            roe: Some(0.04),
            debt_to_equity: Some(4.5),
            revenue_growth: Some(0.01),
            analyst_target: Some(30.0),
            ..Default::default()
        },
        Fundamentals {
            ticker: "LOSS".to_string(),
            company_name: "Cash Burn Co".to_string(),
            sector: "Healthcare".to_string(),
            shares_outstanding: Some(5.0e7),
            ttm_fcf: Some(-4.0e8),
            pe_ratio: Some(-12.0),
            revenue_growth: Some(0.60),
            earnings_growth: Some(-0.30),
            ..Default::default()
        },
        Fundamentals {
            ticker: "EMPTY".to_string(),
            company_name: "Empty Shell".to_string(),
            sector: "Unknown".to_string(),
            shares_outstanding: Some(1.0e6),
            ..Default::default()
        },
    ];
    let prices = vec![
        quote("ACME", 10.0),
        quote("GRWTH", 190.0),
        quote("LEVRD", 35.0),
        quote("LOSS", 8.0),
        quote("EMPTY", 3.0),
    ];
    (funds, prices)
}

#[test]
fn acme_is_cheap_value_stock() {
    let fund = acme();
    let price = quote("ACME", 10.0);

    let dcf = compute_dcf(&fund, &price, &DcfParams::with_rates(0.10, 0.03, 5)).unwrap();
    assert!(dcf.intrinsic_value.unwrap() > 10.0);
    assert!(dcf.margin_of_safety.unwrap() > 0.0);

    let results = run_valuation(&[fund], &[price], 0.10, 0.03, 5).unwrap();
    assert_eq!(results.len(), 1);
    let acme = &results[0];
    assert_eq!(acme.growth_profile, GrowthProfile::Value);
    assert!(matches!(acme.signal, OverallSignal::Undervalued | OverallSignal::Fair));
    assert_eq!(acme.dcf_value, dcf.intrinsic_value);
    assert_eq!(acme.margin_of_safety, dcf.margin_of_safety);
    assert_eq!(acme.fetched_at, Utc.with_ymd_and_hms(2026, 10, 1, 14, 30, 0).unwrap());
}

#[test]
fn composite_scores_stay_in_unit_interval() {
    let (funds, prices) = universe();
    for (wacc, tg, years) in [(0.10, 0.03, 5), (0.07, 0.02, 10), (0.15, -0.01, 3)] {
        let results = run_valuation(&funds, &prices, wacc, tg, years).unwrap();
        assert_eq!(results.len(), funds.len());
        for r in &results {
            assert!((0.0..=1.0).contains(&r.composite_score), "{} scored {}", r.ticker, r.composite_score);
            assert!((0.0..=1.0).contains(&r.pillar_scores.dcf));
            assert!((0.0..=1.0).contains(&r.pillar_scores.fundamentals));
            assert!((0.0..=1.0).contains(&r.pillar_scores.quality));
        }
    }
}

#[test]
fn unavailable_values_are_none_not_sentinels() {
    let (funds, prices) = universe();
    let results = ValuationPipeline::default().run(&funds, &prices);

    let loss = results.iter().find(|r| r.ticker == "LOSS").unwrap();
    assert!(loss.dcf_value.is_none());
    assert!(loss.margin_of_safety.is_none());
    assert!(loss.p_fcf.is_none());
    assert!(loss.five_yr_price.is_none());
    assert!(loss.five_yr_cagr.is_none());
    assert!(loss.five_yr_growth_used.is_none());

    let levered = results.iter().find(|r| r.ticker == "LEVRD").unwrap();
    // debt swamps the discounted cash flows
    assert!(levered.dcf_value.is_none());
    assert_eq!(levered.signal_for(valuation_engine::Metric::MarginOfSafety), MetricSignal::Na);

    let empty = results.iter().find(|r| r.ticker == "EMPTY").unwrap();
    assert_eq!(empty.signal, OverallSignal::InsufficientData);

    for r in &results {
        for value in [r.dcf_value, r.margin_of_safety, r.p_fcf, r.analyst_upside, r.five_yr_price, r.five_yr_cagr]
            .into_iter()
            .flatten()
        {
            assert!(value.is_finite());
        }
    }
}

#[test]
fn growth_names_score_growth_signals() {
    let (funds, prices) = universe();
    let results = ValuationPipeline::default().run(&funds, &prices);
    let growth = results.iter().find(|r| r.ticker == "GRWTH").unwrap();

    assert_eq!(growth.growth_profile, GrowthProfile::Growth);
    assert_eq!(growth.signal_for(valuation_engine::Metric::RevenueGrowth), MetricSignal::Green);
    assert_eq!(growth.signal_for(valuation_engine::Metric::EarningsGrowth), MetricSignal::Green);
    assert_eq!(growth.metric_signals.len(), 11);
}

#[test]
fn identical_inputs_give_identical_outputs() {
    let (funds, prices) = universe();
    let pipeline = ValuationPipeline::new(ValuationConfig::default()).unwrap();
    let first = pipeline.run(&funds, &prices);
    let second = pipeline.run(&funds, &prices);
    assert_eq!(first, second);
}

#[test]
fn builder_matches_pipeline_for_default_config() {
    let fund = acme();
    let price = quote("ACME", 10.0);
    let dcf = compute_dcf(&fund, &price, &DcfParams::default()).unwrap();
    let built = build_valuation_result(&fund, &price, dcf.intrinsic_value, dcf.margin_of_safety);
    let ran = ValuationPipeline::default().run(&[fund], &[price]);
    assert_eq!(ran, vec![built]);
}

#[test]
fn results_serialize_with_expected_keys() {
    let results = ValuationPipeline::default().run(&[acme()], &[quote("ACME", 10.0)]);
    let json = serde_json::to_value(&results[0]).unwrap();

    assert_eq!(json["growth_profile"], "value");
    assert_eq!(json["signal"], "undervalued");
    assert_eq!(json["metric_signals"]["pe"], "green");
    assert_eq!(json["metric_signals"]["ev_ebitda"], "na");
    assert_eq!(json["metric_signals"]["debt_equity"], "green");
    assert!(json["metric_signals"].get("revenue_growth").is_none());
}

#[test]
fn results_read_back_with_optional_fields_omitted() {
    let results = ValuationPipeline::default().run(&[acme()], &[quote("ACME", 10.0)]);
    let mut json = serde_json::to_value(&results[0]).unwrap();
    let fields = json.as_object_mut().unwrap();
    fields.remove("market_cap");
    fields.remove("ev_ebitda");
    fields.remove("beta");

    let back: ValuationResult = serde_json::from_value(json).unwrap();
    assert_eq!(back, results[0]);
    assert!(back.market_cap.is_none());
}
