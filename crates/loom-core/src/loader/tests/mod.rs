mod module_tests;
mod namespace_tests;
