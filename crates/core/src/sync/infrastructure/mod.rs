pub mod sync_worker;
