mod guide_test;
