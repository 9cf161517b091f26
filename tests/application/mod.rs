mod guide_service_test;
