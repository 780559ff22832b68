//! Test doubles and data factories


pub use fixtures::{ScriptedRandom, TestDataFactory};
