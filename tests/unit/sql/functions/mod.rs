// Function library tests
pub mod aggregate_functions_test;
pub mod ranking_functions_test;
pub mod registry_test;
pub mod statistical_functions_test;
