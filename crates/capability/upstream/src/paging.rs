use crate::{TelemetryApi, UpstreamError};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// 单次分页拉取的页数上限。
pub const MAX_PAGES: u32 = 1000;

/// 分页请求过滤条件。
#[derive(Debug, Clone, Default)]
pub struct PageFilter {
    pub hardware_id: String,
    pub equipment_code: String,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl PageFilter {
    /// 全量车队查询（hardwareId/equipmentCode 为空串）。
    pub fn fleet() -> Self {
        Self::default()
    }

    /// 单车时间范围查询。
    pub fn history(hardware_id: impl Into<String>, from_date: String, to_date: String) -> Self {
        Self {
            hardware_id: hardware_id.into(),
            equipment_code: String::new(),
            from_date: Some(from_date),
            to_date: Some(to_date),
        }
    }

    /// 构造第 `page_no` 页的请求体。
    pub fn to_payload(&self, page_no: u32, page_size: u64) -> Value {
        let mut body = Map::new();
        body.insert("hardwareId".to_string(), Value::from(self.hardware_id.clone()));
        body.insert(
            "equipmentCode".to_string(),
            Value::from(self.equipment_code.clone()),
        );
        if let Some(from_date) = &self.from_date {
            body.insert("fromDate".to_string(), Value::from(from_date.clone()));
        }
        if let Some(to_date) = &self.to_date {
            body.insert("toDate".to_string(), Value::from(to_date.clone()));
        }
        body.insert("pageNo".to_string(), Value::from(page_no));
        body.insert("pageSize".to_string(), Value::from(page_size));
        Value::Object(body)
    }
}

/// 分页拉取结果：已拉取的行，以及中断分页的错误（如有）。
#[derive(Debug, Default)]
pub struct PageFetch {
    pub rows: Vec<Value>,
    pub pages: u32,
    pub error: Option<UpstreamError>,
}

impl PageFetch {
    pub fn unauthorized(&self) -> bool {
        self.error
            .as_ref()
            .map(UpstreamError::is_unauthorized)
            .unwrap_or(false)
    }
}

/// 顺序请求固定大小的分页，直到短页或空页；任一请求失败即停止并保留已有数据。
pub async fn fetch_all_pages(
    api: &dyn TelemetryApi,
    token: &str,
    endpoint: &str,
    filter: &PageFilter,
    page_size: u64,
) -> PageFetch {
    let mut fetch = PageFetch::default();
    let mut page_no: u32 = 1;
    loop {
        let body = filter.to_payload(page_no, page_size);
        let rows = match api.fetch_page(token, endpoint, &body).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(
                    target: "fleet.upstream",
                    endpoint = endpoint,
                    page_no = page_no,
                    rows_so_far = fetch.rows.len(),
                    error = %err,
                    "page_fetch_failed"
                );
                fetch.error = Some(err);
                break;
            }
        };
        let count = rows.len();
        debug!(
            target: "fleet.upstream",
            endpoint = endpoint,
            page_no = page_no,
            rows = count,
            "page_fetched"
        );
        if count == 0 {
            break;
        }
        fetch.pages += 1;
        fetch.rows.extend(rows);
        if (count as u64) < page_size {
            break;
        }
        if page_no >= MAX_PAGES {
            warn!(
                target: "fleet.upstream",
                endpoint = endpoint,
                pages = page_no,
                "page_limit_reached"
            );
            break;
        }
        page_no += 1;
    }
    fetch
}
