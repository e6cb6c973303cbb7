mod build_constants_tests;
mod config_tests;
mod layout_tests;
mod operation_id_tests;
mod operation_output_tests;
mod test_utils;
