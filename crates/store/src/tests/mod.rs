mod guard_tests;
mod helpers;
