mod pool_test;
