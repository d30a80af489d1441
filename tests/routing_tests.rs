use serde_json::json;

use trademem::config::Config;
use trademem::domain::{Query, QueryResult};
use trademem::expert::{AgentDecisionExpert, MarketRegimeExpert, TradeHistoryExpert};
use trademem::memory::SharedMemory;
use trademem::testkit::domain::{decision_payload, trade};

fn populated() -> SharedMemory {
    let memory = SharedMemory::default();
    memory.store_trade(trade("SOL", 1));
    memory.store_trade(trade("BTC", 2));
    memory.update_regime("SOL", "bull");
    memory.record_decision("momentum", decision_payload("buy"));
    memory
}

#[test]
fn trade_request_reaches_only_trade_history() {
    let memory = populated();
    let results = memory.query(&json!({"type": "trade", "symbol": "SOL"}));

    assert_eq!(results.len(), 1);
    assert!(matches!(&results[0], QueryResult::Trade { record, .. } if record.symbol == "SOL"));

    let router = memory.stats().router;
    assert_eq!(router.total_queries, 1);
    assert_eq!(router.dispatch_counts[TradeHistoryExpert::NAME], 1);
    assert_eq!(router.dispatch_counts[MarketRegimeExpert::NAME], 0);
    assert_eq!(router.dispatch_counts[AgentDecisionExpert::NAME], 0);
}

#[test]
fn declared_types_route_to_their_expert() {
    let memory = populated();
    let cases = [
        (json!({"type": "recent_trades"}), TradeHistoryExpert::NAME),
        (json!({"type": "pattern", "symbol": "SOL"}), MarketRegimeExpert::NAME),
        (json!({"type": "CONSENSUS"}), AgentDecisionExpert::NAME),
    ];
    for (request, expected) in cases {
        let routes = memory.router().route(&Query::from_request(&request), 1);
        assert_eq!(routes.len(), 1, "{request}");
        assert_eq!(routes[0].expert, expected, "{request}");
    }
}

#[test]
fn unmatched_request_returns_nothing() {
    let memory = populated();
    let results = memory.query(&json!({"type": "weather", "city": "Oslo"}));
    assert!(results.is_empty());
    assert_eq!(memory.stats().router.total_queries, 1);
}

#[test]
fn keyword_scoring_applies_to_freeform_requests() {
    let memory = populated();
    let results = memory.query(&json!({"question": "what regime is SOL in?", "symbol": "SOL"}));
    assert_eq!(
        results,
        vec![QueryResult::Regime {
            symbol: "SOL".into(),
            label: "bull".into()
        }]
    );
}

#[test]
fn wider_top_k_concatenates_experts_in_score_order() {
    let memory = populated();
    // Mentions both trades (0.6) and a regime keyword (0.7).
    let query = Query::from_request(&json!({"q": "trade during bull trend", "symbol": "SOL"}));

    let routes = memory.router().route(&query, 3);
    let names: Vec<_> = routes.iter().map(|r| r.expert).collect();
    assert_eq!(names, vec![MarketRegimeExpert::NAME, TradeHistoryExpert::NAME]);

    let results = memory.query_top_k(&query, 3);
    assert!(matches!(results[0], QueryResult::Regime { .. }));
    assert!(matches!(results[1], QueryResult::Trade { .. }));
}

#[test]
fn top_k_zero_still_consults_best_expert() {
    let memory = populated();
    let results = memory.query_top_k(&Query::decisions("momentum", 5), 0);
    assert_eq!(results.len(), 1);
}

#[test]
fn confidence_threshold_is_configurable() {
    let mut config = Config::default();
    config.router.min_confidence = 0.65;
    let memory = SharedMemory::new(&config);
    memory.store_trade(trade("SOL", 1));

    // Keyword confidence 0.6 no longer clears the bar.
    let results = memory.query(&json!({"q": "last trade", "symbol": "SOL"}));
    assert!(results.is_empty());
    assert_eq!(memory.query_typed(&Query::trades("SOL", 5)).len(), 1);
}
