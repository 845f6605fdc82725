fn main() {
    peerplug::app::startup::startup();
}
