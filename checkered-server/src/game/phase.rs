pub enum RacePhase {
    // Racers sit on the grid; positions aren't tracked yet
    CountingDown { ticks_left: u64 },
    // Gates and laps are tracked and racers get ranked every tick
    Racing,
    // Everyone has crossed the line; standings are final
    AllRacersDone,
}

impl RacePhase {
    pub fn starting(countdown_ms: u64, tick_ms: u64) -> RacePhase {
        let ticks_left = countdown_ms / tick_ms.max(1);
        if ticks_left == 0 {
            RacePhase::Racing
        } else {
            RacePhase::CountingDown { ticks_left }
        }
    }
}
