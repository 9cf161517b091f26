mod image_server_test;
mod json_store_test;
