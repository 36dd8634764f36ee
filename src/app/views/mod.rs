pub mod job_orders;
