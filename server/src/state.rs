use std::sync::Arc;

use redis::{aio::ConnectionManager, Client};

use super::{
    config::Config,
    database::{init_redis, seed_projects},
    views::Views,
};

pub struct State {
    pub config: Config,
    pub redis_client: Client,
    pub redis_connection: ConnectionManager,
    pub views: Views,
}

impl State {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let (redis_client, redis_connection) = init_redis(&config.redis_url).await;

        seed_projects(redis_connection.clone(), &config.projects_seed).await;

        Arc::new(Self {
            config,
            redis_client,
            redis_connection,
            views: Views::default(),
        })
    }
}
