//! Unit tests for the board bounded context.

mod recurrence_tests;
mod support;
