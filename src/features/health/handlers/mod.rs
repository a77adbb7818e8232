pub mod health_handler;
