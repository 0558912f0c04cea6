use std::time::Duration;

use aniroute::{AnirouteError, HealthConfig, HealthState};
use aniroute_mock::{DynamicMockSource, MockBehavior};

use crate::helpers::manager;

fn health_cfg() -> HealthConfig {
    HealthConfig {
        interval: Duration::from_secs(60),
        probe_timeout: Duration::from_secs(2),
        degraded_latency: Duration::from_millis(500),
    }
}

#[tokio::test(start_paused = true)]
async fn probes_map_to_states_and_availability() {
    let (fast, _fast_ctl) = DynamicMockSource::new_with_controller("fast");
    let (slow, slow_ctl) = DynamicMockSource::new_with_controller("slow");
    let (down, down_ctl) = DynamicMockSource::new_with_controller("down");
    let (stuck, stuck_ctl) = DynamicMockSource::new_with_controller("stuck");
    slow_ctl
        .set_health(MockBehavior::Delay(Duration::from_millis(900), true))
        .await;
    down_ctl
        .set_health(MockBehavior::Fail(AnirouteError::provider("down", "refused")))
        .await;
    stuck_ctl.set_health(MockBehavior::Hang).await;

    let m = manager()
        .health(health_cfg())
        .with_source(fast)
        .with_source(slow)
        .with_source(down)
        .with_source(stuck)
        .build()
        .unwrap();

    let snap = m.check_all_health().await;
    assert_eq!(snap["fast"].state, HealthState::Online);
    assert_eq!(snap["slow"].state, HealthState::Degraded);
    assert!(snap["slow"].latency_ms.unwrap() >= 900);
    assert_eq!(snap["down"].state, HealthState::Offline);
    assert!(snap["down"].latency_ms.is_some());
    assert_eq!(snap["stuck"].state, HealthState::Offline);
    assert_eq!(snap["stuck"].latency_ms, None);

    let registry = m.registry();
    assert!(registry.get("slow").unwrap().is_available());
    assert!(!registry.get("down").unwrap().is_available());
    assert!(!registry.get("stuck").unwrap().is_available());
    assert_eq!(m.health_status(), snap);
}

#[tokio::test(start_paused = true)]
async fn recovery_restores_availability() {
    let (src, ctl) = DynamicMockSource::new_with_controller("flappy");
    ctl.set_health(MockBehavior::Return(false)).await;
    let m = manager()
        .health(health_cfg())
        .with_source(src)
        .build()
        .unwrap();

    m.check_all_health().await;
    assert!(!m.registry().get("flappy").unwrap().is_available());

    ctl.set_health(MockBehavior::Return(true)).await;
    m.check_all_health().await;
    assert!(m.registry().get("flappy").unwrap().is_available());
}

#[tokio::test(start_paused = true)]
async fn monitor_runs_per_interval_until_shutdown() {
    let (src, ctl) = DynamicMockSource::new_with_controller("s");
    let m = manager()
        .health(health_cfg())
        .with_source(src)
        .build()
        .unwrap();

    let handle = m.spawn_health_monitor();
    tokio::time::sleep(Duration::from_secs(130)).await;
    // immediate cycle plus one at 60s and one at 120s
    assert_eq!(ctl.calls(aniroute_mock::Op::HealthCheck).await, 3);

    m.shutdown();
    handle.await.unwrap();
}
