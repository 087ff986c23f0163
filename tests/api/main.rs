mod helpers;
mod postgres_store;
mod send_email;
