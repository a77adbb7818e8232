pub mod proxy_handler;
