mod metadata_tests;
mod registry_tests;
