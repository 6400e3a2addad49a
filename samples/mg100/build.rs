// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::path::Path;

fn main() {
    // Start from the library's settings, so `locking::shell` is only used when it was built.
    let manifest = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set");
    let base = Path::new(&manifest).join("../../locking/prj.conf");
    locking_build::export_bool_kconfig_over(&base);
}
