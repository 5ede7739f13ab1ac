//! Unit tests for the capability registry.
