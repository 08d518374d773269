use std::net::SocketAddr;

use apalis::{
    cron::{CronStream, Schedule},
    layers::retry::{RetryLayer, RetryPolicy},
    prelude::{Monitor, WorkerBuilder, WorkerFactoryFn},
    utils::TokioExecutor,
};
use shuttle_runtime::CustomError;
use sqlx::PgPool;
use tracing::{error, info};

use crate::config::Config;
use crate::context::AppContext;
use crate::rate_sync_job::{rate_sync_job, RateSync};
use crate::routes;

pub struct TripService {
    pub ctx: AppContext,
    pub rates_sync_schedule: Schedule,
}

impl TripService {
    pub fn new(pool: PgPool, config: Config) -> Self {
        Self {
            ctx: AppContext::new(pool, &config),
            rates_sync_schedule: config.rates_sync_schedule,
        }
    }
}

#[shuttle_runtime::async_trait]
impl shuttle_runtime::Service for TripService {
    async fn bind(self, addr: SocketAddr) -> Result<(), shuttle_runtime::Error> {
        let worker = WorkerBuilder::new("rate-sync")
            .layer(RetryLayer::new(RetryPolicy::retries(3)))
            .data(self.ctx.clone())
            .stream(CronStream::<RateSync, _>::new(self.rates_sync_schedule).into_stream())
            .build_fn(rate_sync_job);

        let monitor = Monitor::<TokioExecutor>::new().register(worker);
        let server = warp::serve(routes::api(self.ctx)).run(addr);

        info!("serving trip planner on {}", addr);
        tokio::select! {
            _ = server => {
                error!("http server stopped");
            }
            result = monitor.run() => {
                if let Err(e) = result {
                    error!("rate sync monitor failed: {}", e);
                    return Err(CustomError::new(e).into());
                }
            }
        }

        Ok(())
    }
}
