mod concurrency_test;
mod flatten_test;
mod left_recursion_test;
mod properties_test;
mod reporting_test;
