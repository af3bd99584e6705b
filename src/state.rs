use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::api::BookingApi;
use crate::services::catalog::CatalogService;
use crate::services::payments::PaymentDesk;
use crate::services::session::SessionContext;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub api: Arc<dyn BookingApi>,
    pub payments: Arc<PaymentDesk>,
    pub session: SessionContext,
    pub catalog: CatalogService,
}

impl AppState {
    pub fn new(config: AppConfig, conn: Connection, api: Arc<dyn BookingApi>) -> Self {
        let db = Arc::new(Mutex::new(conn));
        Self {
            payments: Arc::new(PaymentDesk::new(api.clone(), config.confirm_delay)),
            session: SessionContext::new(db.clone(), config.session_policy()),
            catalog: CatalogService::new(api.clone(), db.clone()),
            db,
            config,
            api,
        }
    }
}
