//! CustomResourceDefinition output

use anyhow::Result;
use kube::CustomResourceExt;
use operator_lib::crd::Monitor;

use crate::output::print_json;

/// Print the Monitor CRD as JSON, ready for `kubectl apply -f -`
pub fn print_crd() -> Result<()> {
    print_json(&Monitor::crd())
}
