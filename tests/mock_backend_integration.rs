use candlefeed::application::chart_state::ChartState;
use candlefeed::application::feed::LiveFeed;
use candlefeed::application::system::{Application, SystemHandle};
use candlefeed::config::{FeedConfig, ServerConfig};
use candlefeed::domain::errors::ApiError;
use candlefeed::domain::market::{FeedEvent, Timeframe};
use candlefeed::infrastructure::ApiClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const BACKFILL: usize = 30;

async fn start_backend() -> (SystemHandle, ApiClient, Arc<LiveFeed>) {
    let feed = FeedConfig {
        update_interval_ms: 50,
        heartbeat_interval_ms: 200,
        backfill_candles: BACKFILL,
        pattern_probability: 0.5,
        channel_capacity: 256,
        seed: Some(1234),
    };
    let app = Application::build(ServerConfig::ephemeral(feed)).unwrap();
    let feed = app.feed.clone();
    let handle = app.start().await.unwrap();

    let client = ApiClient::new(
        &format!("http://{}", handle.http_addr),
        &format!("ws://{}", handle.ws_addr),
    );
    (handle, client, feed)
}

async fn wait_for_idle(feed: &LiveFeed) -> bool {
    timeout(Duration::from_secs(5), async {
        while feed.active_feeds() > 0 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .is_ok()
}

#[tokio::test]
async fn test_top_picks_are_capped_at_ten() {
    let (handle, client, _feed) = start_backend().await;

    let picks = client.get_top_picks(3).await.unwrap();
    assert_eq!(picks.len(), 3);
    assert_eq!(picks[0].symbol, "AAPL");

    let picks = client.get_top_picks(50).await.unwrap();
    assert_eq!(picks.len(), 10);

    let picks = client.get_top_picks(0).await.unwrap();
    assert!(picks.is_empty());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_stock_and_patterns() {
    let (handle, client, _feed) = start_backend().await;

    let stock = client.get_stock_details("MSFT").await.unwrap();
    assert_eq!(stock.symbol, "MSFT");
    assert_eq!(stock.name, "MSFT Inc.");
    assert!(stock.price >= 100.0 && stock.price <= 300.0);

    let patterns = client
        .get_patterns("MSFT", Timeframe::OneDay, 7)
        .await
        .unwrap();
    assert_eq!(patterns.len(), 5);
    for p in &patterns {
        assert!((0.7..=1.0).contains(&p.confidence));
        assert!((1..=5).contains(&p.strength));
    }

    handle.shutdown().await;
}

#[tokio::test]
async fn test_invalid_symbol_is_not_found() {
    let (handle, client, _feed) = start_backend().await;

    let err = client.get_stock_details("msft").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::HttpStatus {
            endpoint: "stock details".to_string(),
            status: 404
        }
    );
    assert_eq!(err.to_string(), "Failed to fetch stock details: HTTP 404");

    handle.shutdown().await;
}

#[tokio::test]
async fn test_unknown_route_and_cors() {
    let (handle, _client, _feed) = start_backend().await;
    let http = reqwest::Client::new();
    let base = format!("http://{}", handle.http_addr);

    let response = http
        .get(format!("{}/api/nothing", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Not found");

    let response = http
        .request(reqwest::Method::OPTIONS, format!("{}/api/stock/AAPL", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert!(response.headers().contains_key("access-control-allow-methods"));

    handle.shutdown().await;
}

#[tokio::test]
async fn test_live_feed_drives_chart_state() {
    let (handle, client, _feed) = start_backend().await;

    let mut stream = client.connect_live("AAPL", Timeframe::FiveMin).await.unwrap();
    let mut chart = ChartState::new("AAPL", Timeframe::FiveMin);
    chart.set_connected(true);

    let first = timeout(Duration::from_secs(5), stream.next_event())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let FeedEvent::Historical(candles) = &first else {
        panic!("expected historical batch first, got {:?}", first);
    };
    assert_eq!(candles.len(), BACKFILL);
    chart.apply(first);

    let mut updates = 0;
    while updates < 5 {
        let event = timeout(Duration::from_secs(5), stream.next_event())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if let FeedEvent::CandleUpdate(candle) = &event {
            assert!(candle.is_well_formed());
            updates += 1;
        }
        chart.apply(event);
    }

    assert!(chart.candles().len() >= BACKFILL + 5);
    assert_eq!(
        chart.current_price(),
        chart.candles().latest().unwrap().close
    );
    let stats = chart.candle_stats().unwrap();
    assert!(stats.low <= stats.high);
    assert!(stats.volatility >= 0.0);

    stream.close().await.unwrap();
    handle.shutdown().await;
}

#[tokio::test]
async fn test_live_feed_rejects_unknown_timeframe() {
    let (handle, _client, _feed) = start_backend().await;

    let url = format!("ws://{}/ws/live/AAPL?timeframe=2h", handle.ws_addr);
    let result = tokio_tungstenite::connect_async(url.as_str()).await;
    assert!(result.is_err());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_dropped_client_tears_down_feed() {
    let (handle, client, feed) = start_backend().await;

    let mut stream = client.connect_live("TSLA", Timeframe::OneMin).await.unwrap();
    let first = timeout(Duration::from_secs(5), stream.next_event())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(first, Some(FeedEvent::Historical(_))));
    assert_eq!(feed.active_feeds(), 1);

    // No close frame: the socket just goes away.
    drop(stream);
    assert!(wait_for_idle(&feed).await, "feed still running after client vanished");

    handle.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_stops_open_feeds() {
    let (handle, client, feed) = start_backend().await;

    let mut stream = client.connect_live("NVDA", Timeframe::OneMin).await.unwrap();
    let first = timeout(Duration::from_secs(5), stream.next_event())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(first, Some(FeedEvent::Historical(_))));
    assert_eq!(feed.active_feeds(), 1);

    handle.shutdown().await;
    assert_eq!(feed.active_feeds(), 0);

    // Whatever was already in flight drains, then the server side is gone.
    let ended = timeout(Duration::from_secs(5), async {
        loop {
            match stream.next_event().await {
                Ok(Some(_)) => continue,
                Ok(None) | Err(_) => break,
            }
        }
    })
    .await;
    assert!(ended.is_ok(), "live feed kept streaming after shutdown");
}
