
// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - availability_properties: Calculator invariants over many steps and durations
// - booking_flow: Booking, rescheduling and status changes through the actor
// - json_store: Persisting and reloading the JSON data file
