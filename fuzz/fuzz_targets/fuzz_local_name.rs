// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

#![no_main]

use autonova_ci::domain::local_name;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|tag: &str| {
    let once = local_name(tag);
    assert_eq!(local_name(once), once);
    assert!(!once.contains('}'));
});
