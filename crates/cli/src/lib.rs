// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Empty library target so other workspace members can depend on this
//! package as a path dependency and have Cargo set `CARGO_BIN_EXE_workbot`
//! for their integration tests.
