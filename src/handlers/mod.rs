// handlers/mod.rs - one directory per resource, one file per route shape
pub mod certificates;
pub mod tags;
