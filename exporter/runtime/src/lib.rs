#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use policyreport_exporter_core as core;
pub use policyreport_exporter_k8s_api as k8s;
pub use policyreport_exporter_k8s_index as index;

mod args;

pub use self::args::Args;
