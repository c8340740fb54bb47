//! 车辆列表与车队统计
//!
//! - GET /vehicles - 当前快照列表（不含历史）
//! - GET /fleet-stats - 按状态计数、订阅数、总里程
//!
//! 携带有效 token 时按角色过滤可见车辆；未携带时返回全部。

use api_contract::{ApiResponse, FleetStatsDto, VehicleSnapshotDto};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::{Principal, VehicleStatus};
use fleet_storage::VehicleRecord;

use crate::AppState;
use crate::middleware::optional_principal;
use crate::utils::response::{storage_error, vehicle_to_snapshot};

/// 读取当前主体可见的车辆。
async fn visible_vehicles(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Vec<VehicleRecord>, Response> {
    let principal = optional_principal(state, headers)?;
    let items = state
        .vehicle_store
        .list_vehicles()
        .await
        .map_err(storage_error)?;
    Ok(filter_visible(items, principal.as_ref()))
}

fn filter_visible(items: Vec<VehicleRecord>, principal: Option<&Principal>) -> Vec<VehicleRecord> {
    match principal {
        Some(principal) => items
            .into_iter()
            .filter(|item| principal.can_view(&item.id, &item.equipment_config))
            .collect(),
        None => items,
    }
}

/// 列出车辆
pub async fn list_vehicles(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let items = match visible_vehicles(&state, &headers).await {
        Ok(items) => items,
        Err(response) => return response,
    };
    let data: Vec<VehicleSnapshotDto> = items
        .into_iter()
        .map(|record| vehicle_to_snapshot(record.without_history()))
        .collect();
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// 车队统计
pub async fn fleet_stats(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let items = match visible_vehicles(&state, &headers).await {
        Ok(items) => items,
        Err(response) => return response,
    };
    (StatusCode::OK, Json(ApiResponse::success(compute_fleet_stats(&items)))).into_response()
}

/// 汇总车辆状态。订阅状态取 equipmentConfig.activeSubscription，
/// 减排量取原始数据中的 co2Saved（缺失计 0）。
pub fn compute_fleet_stats(items: &[VehicleRecord]) -> FleetStatsDto {
    let mut stats = FleetStatsDto::default();
    for item in items {
        stats.total_count += 1;
        match item.status {
            VehicleStatus::On => stats.online_count += 1,
            VehicleStatus::Off => stats.offline_count += 1,
            VehicleStatus::Idle => stats.idle_count += 1,
            VehicleStatus::Immobilized => stats.immobilized_count += 1,
            VehicleStatus::NonCommunicating => stats.non_communicating_count += 1,
            _ => {}
        }
        if item.status.is_charging() {
            stats.charging_count += 1;
        }
        let active = item
            .equipment_config
            .get("activeSubscription")
            .and_then(|value| value.as_str())
            .is_some_and(|value| value.eq_ignore_ascii_case("active"));
        if active {
            stats.active_subscriptions += 1;
        } else {
            stats.inactive_subscriptions += 1;
        }
        stats.total_km += item.metrics.total_km;
        stats.total_co2_saved += item
            .raw
            .get("co2Saved")
            .and_then(|value| match value {
                serde_json::Value::Number(number) => number.as_f64(),
                serde_json::Value::String(text) => text.trim().parse().ok(),
                _ => None,
            })
            .unwrap_or(0.0);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_app;
    use crate::test_support::{body_json, get_request, test_state};
    use axum::http::{HeaderValue, Request, header};
    use domain::{NormalizedVehicle, VehicleMetrics};
    use fleet_auth::JwtManager;
    use serde_json::json;
    use tower::ServiceExt;

    fn vehicle(id: &str, status: VehicleStatus, total_km: f64, config: serde_json::Value) -> NormalizedVehicle {
        NormalizedVehicle {
            id: id.to_string(),
            display_device_id: format!("OM-{id}"),
            chassis_number: String::new(),
            registration_no: String::new(),
            status,
            location: Default::default(),
            metrics: VehicleMetrics {
                total_km,
                ..VehicleMetrics::default()
            },
            raw: json!({ "HWID": id, "co2Saved": "12.5" }),
            equipment_config: config,
            sample_timestamp: None,
        }
    }

    async fn seed(state: &AppState, vehicles: &[NormalizedVehicle]) {
        for item in vehicles {
            let sample = item.to_sample("2024-05-01T00:00:00.000Z".to_string(), 1);
            state
                .vehicle_store
                .upsert_vehicle(item, sample, state.history_cap, 1)
                .await
                .expect("upsert");
        }
    }

    #[test]
    fn stats_count_statuses_and_subscriptions() {
        let records: Vec<VehicleRecord> = [
            vehicle("1", VehicleStatus::On, 10.0, json!({ "activeSubscription": "Active" })),
            vehicle("2", VehicleStatus::OnCharge, 5.5, json!({})),
            vehicle("3", VehicleStatus::Charging, 0.0, json!({ "activeSubscription": "expired" })),
            vehicle("4", VehicleStatus::Immobilized, 1.0, json!({})),
        ]
        .iter()
        .map(|item| VehicleRecord::from_normalized(item, 0))
        .collect();

        let stats = compute_fleet_stats(&records);
        assert_eq!(stats.total_count, 4);
        assert_eq!(stats.online_count, 1);
        assert_eq!(stats.charging_count, 2);
        assert_eq!(stats.immobilized_count, 1);
        assert_eq!(stats.active_subscriptions, 1);
        assert_eq!(stats.inactive_subscriptions, 3);
        assert_eq!(stats.total_km, 16.5);
        assert_eq!(stats.total_co2_saved, 50.0);
    }

    #[tokio::test]
    async fn list_omits_history() {
        let state = test_state(false);
        seed(&state, &[vehicle("123", VehicleStatus::On, 1.0, json!({}))]).await;
        let response = build_app(state)
            .oneshot(get_request("/vehicles"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let items = body["data"].as_array().expect("array");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], "123");
        assert_eq!(items[0]["displayDeviceId"], "OM-123");
        assert!(items[0].get("history").is_none());
    }

    #[tokio::test]
    async fn customer_token_sees_only_own_vehicles() {
        let state = test_state(false);
        seed(
            &state,
            &[
                vehicle("1", VehicleStatus::On, 0.0, json!({ "customerCode": "C-1" })),
                vehicle("2", VehicleStatus::On, 0.0, json!({ "customerCode": "C-2" })),
            ],
        )
        .await;
        let mut principal = Principal::new("u-1", "acme", domain::roles::ROLE_CUSTOMER);
        principal.customer_code = Some("C-1".to_string());
        let tokens = JwtManager::new(crate::test_support::TEST_SECRET.to_string(), 3600)
            .issue_tokens(&principal)
            .expect("token");
        let request = Request::builder()
            .uri("/api/vehicles")
            .header(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", tokens.access_token)).expect("header"),
            )
            .body(axum::body::Body::empty())
            .expect("request");

        let response = build_app(state).oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let ids: Vec<&str> = body["data"]
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|item| item["id"].as_str())
            .collect();
        assert_eq!(ids, vec!["1"]);
    }
}
