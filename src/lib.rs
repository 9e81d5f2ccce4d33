// Library for tests to access modules

pub mod config;
pub mod dispatcher;
pub mod docker_repo;
pub mod error;
pub mod host_repo;
pub mod models;
pub mod relay;
pub mod routes;
pub mod systemd_repo;
pub mod version;
