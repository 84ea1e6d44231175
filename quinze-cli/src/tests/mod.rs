//! Shared test harness modules for the Quinze CLI.

use super::*;

mod helpers;
