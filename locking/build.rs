// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

// Make the locking configuration available as cfgs and as the `locking::kconfig` module.

fn main() {
    locking_build::export_bool_kconfig();
    locking_build::build_kconfig_mod();
}
