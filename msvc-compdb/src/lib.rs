// SPDX-License-Identifier: GPL-3.0-or-later

pub mod args;
pub mod config;
pub mod event;
pub mod output;
pub mod session;
pub mod split;
pub mod translate;
