// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

pub mod sanitizer;
pub mod smoke;
pub mod timelog_client;
pub mod xml;
