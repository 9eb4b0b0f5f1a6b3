// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

#![no_main]

use autonova_ci::domain::local_name;
use autonova_ci::services::xml::root_element;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(root) = root_element(data) {
        assert!(!root.is_empty());
        let _ = local_name(&root);
    }
});
