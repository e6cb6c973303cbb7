mod extensions_cmd_tests;
