// Copyright (c) 2026 Fastcomcorp, LLC. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Carreg PGW Core
//!
//! A minimal PGW-like subscriber session node. Subscribers register by
//! sending their IMSI as a packed-BCD datagram; admitted sessions live in an
//! in-memory table until they time out or the node drains on shutdown. Every
//! session lifecycle event is appended to a CDR file for billing, and a small
//! HTTP surface exposes session queries and the shutdown trigger.

pub mod bcd;
pub mod cdr;
pub mod config;
pub mod core;
pub mod logging;
pub mod state;
