mod phase_model_tests;
